pub mod mentions;
