pub use self::append_store::AppendStore;

mod append_store;
