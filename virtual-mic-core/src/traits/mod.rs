pub mod device_delegate;
