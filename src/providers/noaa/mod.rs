pub mod isd_lite;
