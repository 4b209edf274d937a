pub mod embed;
pub mod feed;
pub mod richtext;
