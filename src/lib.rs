//! Intersection Simulation Library
//!
//! A fixed-time four-way signal controller and the car-following vehicle
//! agents that react to it, driven by simulated time.

pub mod simulation;
