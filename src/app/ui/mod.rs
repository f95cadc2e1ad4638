mod details;
mod panels;

pub(super) use details::show_tooltip;
