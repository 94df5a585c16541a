//! Integration tests for the planner store, storage backends and share links.

mod helpers;
mod planner_test;
mod share_test;
