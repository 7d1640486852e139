//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trellis layout
//! engine and its front ends. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds, stacking axes and padding ([`geometry`] module)
//! - **Text**: Text styles and font-backed measurement ([`text`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod text;
