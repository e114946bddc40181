pub mod conversations;
