//! Request helpers shared by handlers

pub mod multipart;
