mod brand;
mod product;

pub use brand::{Brand, BrandInput};
pub use product::{Product, ProductInput, QueryCount};
