//! `impl Database` blocks, one file per table.

mod areas;
mod campaigns;
mod files;
mod phases;
mod themes;
