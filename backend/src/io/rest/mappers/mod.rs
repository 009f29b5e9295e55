pub mod tracker_mapper;
