//! Fetch a published spreadsheet tab as csv and browse it as a filterable table.

pub mod controller;
pub mod domain;
pub mod i18n;
pub mod inputter;
pub mod loader;
pub mod model;
pub mod parser;
pub mod projection;
pub mod resolver;
pub mod table;
pub mod ui;
