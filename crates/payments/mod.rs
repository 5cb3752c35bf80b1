pub mod revenuecat_client;
