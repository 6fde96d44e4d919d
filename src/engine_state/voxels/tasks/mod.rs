//! # Voxel Task System
//!
//! Tasks that build voxel data off the owner thread. Only CPU work happens
//! here; chunks are inserted and meshed once their results come back.

pub mod chunk_generation_task;
