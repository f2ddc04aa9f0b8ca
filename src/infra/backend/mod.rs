mod client;

pub use client::HttpFleetApi;
