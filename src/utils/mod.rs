pub mod hash;
pub mod html;
pub mod redirect;
pub mod session;
