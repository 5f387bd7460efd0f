mod helpers;
mod persistence;
