//! # Routes
//!
//! | Route                        | Method | Handler                         |
//! |------------------------------|--------|---------------------------------|
//! | `/health`                    | GET    | [`health::check`]               |
//! | `/api/add_to_cart`           | POST   | [`cart::add_to_cart`]           |
//! | `/api/get_cart`              | GET    | [`cart::get_cart`]              |
//! | `/api/remove_from_cart`      | POST   | [`cart::remove_from_cart`]      |
//! | `/api/checkout`              | POST   | [`checkout::checkout`]          |
//! | `/api/pos`                   | POST   | [`checkout::dispatch`]          |
//! | `/api/fetch_sales`           | GET    | [`sales::fetch_sales`]          |
//! | `/api/sales/delete/{token}`  | GET    | [`sales::delete_sale`]          |
//! | `/api/receipts/{batch_id}`   | GET    | [`sales::get_receipt`]          |
//!
//! Cart-bearing routes require the `x-session-id` header.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod sales;
