//! Integration tests wiring the index, cache and services together.

mod helpers;

mod hooks_test;
mod index_test;
mod listing_test;
mod snapshot_test;
mod view_test;
