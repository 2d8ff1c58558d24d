pub mod trail_compositor;
