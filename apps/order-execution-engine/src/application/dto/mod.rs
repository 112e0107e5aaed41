//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod order_dto;

pub use order_dto::{CreateOrderDto, SubmitOrderResponseDto};
