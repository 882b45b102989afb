//! Use cases - user story orchestration.
//!
//! Each use case holds its dependencies as `Arc`s and exposes `execute`.

pub mod quiz;

pub use quiz::QuizUseCases;
