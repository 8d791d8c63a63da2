mod bridge;
mod broadcast;
mod dispatch;
mod helpers;
