//! Request and listing models shared by the repositories and routes

pub mod pagination;

pub use pagination::{PageInfo, Paginated, Pagination, PaginationParams};
