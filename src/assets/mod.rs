mod asset_table;

pub use asset_table::AssetTable;
