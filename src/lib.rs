//! regiment: reorder C# type members into a canonical order and fold them into regions.
//!
//! A clean-up pass parses a document with tree-sitter, strips its existing `#region` blocks,
//! moves every member into place and writes the regions it should have. All edits go through a
//! [`buffer::TextBuffer`] inside one undo scope, and the CLI turns the result into an
//! [`edit_plan::EditPlan`] for the files on disk.
#![allow(clippy::multiple_crate_versions)]

pub mod blank_lines;
pub mod buffer;
pub mod cache;
pub mod cleanup;
pub mod config;
pub mod edit_plan;
pub mod error;
pub mod formats;
pub mod input;
pub mod item;
pub mod layout;
pub mod order;
pub mod region_service;
pub mod regions;
pub mod reorganize;
pub mod retrieve;
pub mod tree;
pub mod undo;
