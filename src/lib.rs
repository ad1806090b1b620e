//! vtolscrape - aircraft directory and specification scraper.
//!
//! Builds a per-site directory of aircraft detail pages from listing pages,
//! then extracts each detail page into a dated results table.

pub mod cli;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod storage;
