pub use vellum_core::error::{VellumError, VellumResult};
