pub mod audio_visualizer;
pub mod helpers;
