mod helper;
mod resolver;
mod tracker;
