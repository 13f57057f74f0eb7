// Pagination: page geometry, the one-shot pre-paginator and the live reflow
// engine over a measurable page tree.

pub mod handlers;
pub mod mem_tree;
pub mod page_config;
pub mod pre_paginate;
pub mod reflow;
pub mod tree;

pub use page_config::LayoutConfig;
