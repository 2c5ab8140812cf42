//! Figma REST API integration.
//!
//! This module provides:
//! - [`FigmaClient`] - HTTP client for the Figma REST API (with a curl fallback)
//! - API types for parsing raw Figma JSON into [`RawNode`] trees

pub mod api_types;
pub mod client;

pub use client::{map_figma_error, FigmaClient, FigmaError};

pub use api_types::{
    FigmaColor, FigmaComponent, FigmaComponentSet, FigmaEffect, FigmaFileResponse,
    FigmaImageExport, FigmaImageFills, FigmaNodeEntry, FigmaNodesResponse, FigmaPaint, FigmaStyle,
    FigmaTypeStyle, ImageFormat, NodeType, RawNode,
};
