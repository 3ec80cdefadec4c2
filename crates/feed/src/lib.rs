//! Supply APR page fetcher and the HTML extraction strategies it runs.

pub mod extract;
pub mod html;
pub mod page;
