pub mod track_state;
