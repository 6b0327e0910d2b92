pub mod matrix;
pub mod vector;

// Re-export the value types; everything downstream speaks these.
pub use matrix::Matrix3;
pub use vector::Vector3;
