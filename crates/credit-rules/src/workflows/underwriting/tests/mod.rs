mod codec;
mod common;
mod service;
