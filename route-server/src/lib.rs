//! Campus walking-route server.
//!
//! A web application that answers: "I'm somewhere on campus and my bus is
//! coming - how do I walk to the stop?" Routes are planned over a
//! per-college walking graph under one of three objectives (shortest,
//! fastest, accessible) with Dijkstra or A*.

pub mod cache;
pub mod config;
pub mod cost;
pub mod geo;
pub mod graph;
pub mod planner;
pub mod steps;
pub mod web;
