mod emphasis;
mod strong;

pub use emphasis::EmphasisExtension;
pub use strong::StrongExtension;
