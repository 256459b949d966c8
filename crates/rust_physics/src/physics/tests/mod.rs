//! Whole-pipeline tests driving a world through the physics system

mod callbacks;
