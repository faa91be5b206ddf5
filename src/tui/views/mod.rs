pub mod invoice;
pub mod item_picker;
pub mod new_item;
