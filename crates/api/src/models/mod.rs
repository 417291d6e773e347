//! Domain models for the storefront.
//!
//! Each aggregate (user, product, cart, order, wishlist, category) is loaded
//! whole from its repository, mutated through the methods defined here, and
//! written back. All invariant maintenance lives on the types themselves:
//! default-flag exclusivity on [`user::User`], review aggregation on
//! [`product::Product`], line merging and totals on [`cart::Cart`], and the
//! status machine on [`order::Order`].

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartError, CartItem, CartTotals};
pub use category::Category;
pub use order::{Order, OrderAddress, OrderError, OrderItem};
pub use product::{ColorOption, Product, Review, ReviewError};
pub use user::{Address, PaymentMethod, ProfileError, User};
pub use wishlist::{Wishlist, WishlistEntry, WishlistError};
