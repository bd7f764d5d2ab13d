pub mod test_utils;

mod feed_queries;
