pub mod trial_sweep_loop;
