mod common;
mod routing;
mod som;
