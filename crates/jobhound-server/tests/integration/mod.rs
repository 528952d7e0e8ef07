mod api_tests;
mod scrape_tests;
