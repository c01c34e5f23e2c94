pub mod product;

pub use product::{
    Product, ProductFilters, ProductInput, ProductStatistics, CATEGORY_SUGGESTIONS,
    DEFAULT_CATEGORY, LOW_STOCK_THRESHOLD,
};
