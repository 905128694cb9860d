mod remote_store_tests;
