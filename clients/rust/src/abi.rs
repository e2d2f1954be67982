//! Solidity bindings for the bonding-curve contract and the ledger's
//! token and exchange-rate system contracts.
//!
//! Only the function set the adapters call is declared.

use alloy::sol;

sol! {
    #![sol(all_derives)]

    /// Registry entry for a token launched on the bonding curve.
    struct MemeJobToken {
        address tokenAddress;
        address creatorAddress;
        uint256 fundsRaised;
        uint256 tokensSold;
        address firstBuyer;
        bool distributeRewards;
    }

    /// Bonding-curve contract.
    interface IMemeJob {
        function memeJob(
            string name,
            string symbol,
            string memo,
            address referrer,
            uint256 amount,
            bool distributeRewards
        ) external payable returns (address);

        function buyJob(address memeAddress, uint256 amount, address referrer) external payable;

        function sellJob(address memeAddress, uint256 amount) external;

        /// `txType` 0 quotes a buy.
        function getAmountOut(address memeAddress, uint256 amount, uint8 txType)
            external
            view
            returns (uint256 value);

        function getAllMemeJobs() external view returns (MemeJobToken[] memory);

        function addressToMemeTokenMapping(address token)
            external
            view
            returns (
                address tokenAddress,
                address creatorAddress,
                uint256 fundsRaised,
                uint256 tokensSold,
                address firstBuyer,
                bool distributeRewards
            );
    }

    /// Exchange-rate system contract at `0x…0168`.
    interface IExchangeRate {
        function tinycentsToTinybars(uint256 tinycents) external returns (uint256);
    }

    /// Token facade the ledger exposes at every token's EVM address.
    interface IHederaToken {
        function approve(address spender, uint256 amount) external returns (bool);

        function associate() external returns (int64 responseCode);

        function balanceOf(address account) external view returns (uint256);
    }
}

/// `getAmountOut` transaction type for buy quotes.
pub const QUOTE_BUY: u8 = 0;
