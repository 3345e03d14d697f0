mod delegate;
