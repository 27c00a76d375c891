mod cache;
mod integration;
mod progress;
